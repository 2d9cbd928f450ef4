//! Solidity interface bindings for the contracts the engine consumes.

use alloy_sol_types::sol;

sol! {
    /// The on-chain workflow catalog. Read-only from the engine's side.
    #[derive(Debug)]
    interface IWorkflowRegistry {
        /// The stored workflow record.
        struct Workflow {
            address owner;
            uint8 triggerType;
            bytes triggerData;
            uint8 actionType;
            bytes actionData;
            uint256 nextRun;
            uint256 interval;
            bool active;
            uint256 gasBudget;
        }

        function totalWorkflows() external view returns (uint256 total);
        function getWorkflow(uint256 workflowId) external view returns (Workflow workflow);
        function getWorkflowsByOwner(address owner) external view returns (uint256[] workflowIds);
    }
}

sol! {
    /// The privileged executor. Submitters must hold `WORKER_ROLE`; the
    /// contract rejects executions whose `nextRun` was already advanced,
    /// which is what makes duplicate jobs harmless.
    #[derive(Debug)]
    interface IActionExecutor {
        function executeWorkflow(
            uint256 workflowId,
            bytes actionData,
            uint256 newNextRun,
            address user,
            uint256 gasToCharge
        ) external;

        event WorkflowExecuted(uint256 indexed workflowId, address indexed user, bool success);
    }
}

sol! {
    /// The escrow holding user gas budgets.
    #[derive(Debug)]
    interface IFeeEscrow {
        function balances(address user) external view returns (uint256 balance);
    }
}

sol! {
    /// The standard ERC-20 transfer event, scanned by the wallet-event trigger.
    #[derive(Debug)]
    event Transfer(address indexed from, address indexed to, uint256 value);
}
